//! Integration tests for the entity lifecycle, movement and range visits

mod visit_integration;
