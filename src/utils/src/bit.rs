pub fn mask_of<T: num::One + num::FromPrimitive + std::ops::Shl<Output = T>>(i: i32) -> T {
    T::one() << T::from_i32(i).unwrap()
}

// set_bits yields the index of every set bit of n, lowest first.
pub fn set_bits(mut n: u128) -> impl Iterator<Item = i32> {
    std::iter::from_fn(move || {
        if n == 0 {
            return None;
        }
        let i = n.trailing_zeros();
        n &= n - 1;
        Some(i as i32)
    })
}
