mod sanitizer;
mod signature;
