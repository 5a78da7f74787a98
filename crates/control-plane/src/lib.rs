// Sportsboard Control Plane Library
// Decision: Shared library for binaries (API server, OpenAPI export)

// API routes and types (shared for OpenAPI generation)
pub mod api;

// Authentication: identity provider, sessions, OAuth
pub mod auth;

// Server configuration
pub mod config;

// Storage layer
pub mod storage;

// OpenAPI document generation
pub mod openapi;
