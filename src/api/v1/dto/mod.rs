/*
 * Responsibility
 * - v1 request/response DTOs (camelCase JSON)
 * - request-side validation; responses are built from repo records
 */
pub mod auth;
pub mod countries;
pub mod travellers;
