// The `Error`, `ErrorKind`, `ResultExt` and `Result` types for the library.
// Other modules `use errors::*;` to get access to everything `error_chain!` creates.
// Result is a typedef of std `Result` with the error type our own `Error`.
use error_chain::*;

error_chain! {

    errors {
        // Both maze dimensions must be odd and at least 3 cells.
        InvalidDimensions(width: usize, height: usize) {
            description("maze dimensions must be odd and at least 3")
            display("invalid maze dimensions {}x{}: width and height must be odd and at least 3",
                    width, height)
        }

        InvalidBlockSize(block_size: f64) {
            description("block size must be a finite positive number")
            display("invalid block size {}: must be a finite positive number", block_size)
        }

        InvalidOverscan(overscan: f64) {
            description("overscan must be a finite non-negative number")
            display("invalid overscan {}: must be a finite non-negative number", overscan)
        }

        // Block size and overscan together ask for more frame cells than an index can address.
        FrameTooLarge(block_size: f64, overscan: f64) {
            description("coordinate frame too large")
            display("block size {} with overscan {} needs a coordinate frame too large to index",
                    block_size, overscan)
        }

        UnknownDifficulty(name: String) {
            description("unknown difficulty")
            display("unknown difficulty '{}': expected easy, medium or hard", name)
        }

        // A generator reached a state that a correct algorithm can never reach.
        GenerationInvariant(detail: String) {
            description("maze generation invariant violated")
            display("maze generation invariant violated: {}", detail)
        }
    }
}
