pub mod in_memory_orderer;
pub mod mock_bootstrap;
