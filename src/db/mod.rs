pub mod memory;
pub mod model;
pub mod mongo;
pub mod neo4j;
pub mod repo;

pub use memory::MemoryRepository;
pub use model::*;
pub use mongo::MongoRepository;
pub use neo4j::Neo4jRepository;
pub use repo::*;
