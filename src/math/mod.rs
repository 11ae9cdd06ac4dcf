// Copyright 2020 @TwoCookingMice

pub mod color;
pub mod constants;
pub mod frame;
