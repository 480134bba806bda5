pub mod qrs_server;
