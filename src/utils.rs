pub(crate) mod image_fetcher;
pub mod storage;
