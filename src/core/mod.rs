// Copyright @yucwang 2021

pub mod batch_loader;
pub mod edges;
pub mod lines;
pub mod mesh;
pub mod tangent_space;
