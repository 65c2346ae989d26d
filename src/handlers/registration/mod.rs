pub mod check;
pub mod commit;
