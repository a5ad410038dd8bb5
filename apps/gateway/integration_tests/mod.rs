// Integration tests for gateway startup wiring
mod startup;
