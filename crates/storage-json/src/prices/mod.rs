mod repository;

pub use repository::JsonPriceRepository;
