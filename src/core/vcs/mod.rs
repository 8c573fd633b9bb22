pub mod feedstock;

pub use feedstock::FeedstockRepo;
