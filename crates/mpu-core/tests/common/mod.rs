pub mod put_server;
