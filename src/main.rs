#![allow(non_snake_case)]
use RustedScaling::Examples::scaling_examples::scaling_examples;

fn main() {
    // 0 - power-law fit, 1 - NPL fit
    let example = 0;
    match scaling_examples(example) {
        Ok(result) => println!("covariance {}", result.covariance),
        Err(e) => println!("fit failed: {}", e),
    }
}
