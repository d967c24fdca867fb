pub mod embedding;
pub mod links;
pub mod record;
pub mod scores;
pub mod sector;

pub use embedding::{SectorEmbedding, SectorVectors};
pub use links::{LinkType, MemoryLink};
pub use record::{Memory, MemoryMetadata, MemoryRecord};
pub use scores::{DecayRate, LinkWeight, Salience, Strength};
pub use sector::Sector;
