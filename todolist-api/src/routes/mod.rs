/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration and login
/// - `user`: The caller's profile and own tasks
/// - `admin`: User and task management for administrators

pub mod admin;
pub mod auth;
pub mod health;
pub mod user;
