mod baseline;
mod common;
mod insight;
