
mod orchestrator_tests;
