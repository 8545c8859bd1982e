pub mod po;
