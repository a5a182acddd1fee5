mod common;
mod extraction;
mod requirements;
