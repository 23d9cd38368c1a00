mod ddl;
mod dml;
mod transaction;
