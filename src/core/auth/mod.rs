//! Authentication module
//!
//! This module provides authentication functionality including:
//! - Password hashing with bcrypt
//! - Stateless session tokens (HS256 JWT)
//! - User registration and login
//! - The access guard protecting note routes

pub mod api;
pub mod guard;
pub mod jwt;
pub mod password;
pub mod service;

pub use api::{ApiError, AuthApiState, auth_api_router};
pub use guard::{AuthenticatedUser, GuardError, authenticate};
pub use jwt::{Claims, JwtConfig, JwtError, JwtService, SessionToken};
pub use password::{HashError, PasswordHasher};
pub use service::{AuthError, AuthService, LoginRequest, LoginResponse, RegisterRequest};
