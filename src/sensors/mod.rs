// Copyright @yucwang 2026

pub mod drag_controller;
