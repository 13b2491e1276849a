pub mod book;
pub mod classification;
pub mod classification_detail;
pub mod division;
pub mod user;
