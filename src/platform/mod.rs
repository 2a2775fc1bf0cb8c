// Boundaries to external collaborators: landmark detection and text generation

pub mod generation;
pub mod pose;
