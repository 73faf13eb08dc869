pub mod bills_controller;
pub mod bills_service;
pub mod dto;
