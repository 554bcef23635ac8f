//! Cross-module tests for the scene pipeline

mod frame_pipeline;
