//! Cross-module scenarios: registry, octree, collision pass and debug output
//! working together.

mod simulation_integration;
