pub mod claim_service;
pub mod mail_service;
