//! # Voxel World
//!
//! Storage and generation of the block world.
//!
//! ## Architecture
//!
//! * **Block**: block types, the six directions, and the static per-type tables
//! * **Area**: fixed-size cubes of blocks with heightmaps, circuit state and structure queues
//! * **World**: the area store and neighbor graph, plus change propagation and searches
//! * **Spawn**: which areas must exist around the observers
//! * **Generation**: noise terrain and multi-area structures
//! * **Tasks**: area generation on worker threads
//!
//! ## Data Flow
//!
//! 1. The spawn scheduler picks missing area coordinates near observers
//! 2. Generation tasks fill those areas on workers
//! 3. The world inserts each filled area and links it to its neighbors
//! 4. Queued structures are placed once every area they overlap exists
//! 5. Every block write flags the owner and its neighbors for remeshing

pub mod area;
pub mod block;
pub mod change;
pub mod generation;
pub mod search;
pub mod spawn;
pub mod tasks;
pub mod world;
