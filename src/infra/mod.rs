pub mod catalog_store_adapter;
pub mod csv_output_adapter;
pub mod json_output_adapter;
