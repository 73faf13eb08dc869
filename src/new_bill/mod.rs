pub mod new_bill_controller;
pub mod new_bill_service;
