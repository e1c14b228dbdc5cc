// Copyright @yucwang 2021

pub mod bsdf;
pub mod bvh;
pub mod integrator;
pub mod interaction;
pub mod rng;
pub mod scene;
pub mod scene_loader;
pub mod sensor;
pub mod shape;
