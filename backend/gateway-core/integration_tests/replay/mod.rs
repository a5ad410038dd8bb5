mod sanitizer;
