mod cache;
mod geometry;
mod tests;
