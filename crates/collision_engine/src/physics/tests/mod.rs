//! Multi-module scenarios driven through the full tick
