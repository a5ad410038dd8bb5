mod listen;
mod replay;
