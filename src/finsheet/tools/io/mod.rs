pub mod audit_json;
pub mod excel_read;
pub mod excel_write;
