pub mod record_reader;
pub mod record_writer;
pub mod row;
