pub mod ai_client;
pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error_convert;
pub mod health;
pub mod lifecycle;
pub mod openapi;
pub mod repo;
pub mod rest;
pub mod telemetry;
