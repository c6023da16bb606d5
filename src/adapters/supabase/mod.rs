//! Supabase platform adapters: the PostgREST data API and edge functions.

pub mod functions;
pub mod rest;
