fn main() {
    soloist::main();
}
