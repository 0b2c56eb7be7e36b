mod cohere_client;

pub use cohere_client::CohereClient;
