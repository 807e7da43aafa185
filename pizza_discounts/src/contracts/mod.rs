pub mod import_sale_status;
