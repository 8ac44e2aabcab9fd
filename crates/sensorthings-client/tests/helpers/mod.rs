pub mod memory_gateway;
pub mod mock_sta_server;
