use std::ptr::NonNull;
use proptest::prelude::*;
use dynarray::{
	DynArray,
	DynamicArray,
	unchecked
};

proptest! {
	#[test]
	fn pushed_values_are_retrievable(values in proptest::collection::vec(any::<i64>(), 0..200)) {
		let mut array: DynArray<i64> = DynArray::new();
		for (k, v) in values.iter().enumerate() {
			array.push(*v);
			prop_assert_eq!(array.len(), k + 1);
		}
		for (i, v) in values.iter().enumerate() {
			prop_assert_eq!(array[i], *v);
		}
	}

	#[test]
	fn pop_undoes_push(values in proptest::collection::vec(any::<u16>(), 0..64), extra in any::<u16>()) {
		let mut array: DynArray<u16> = values.iter().copied().collect();
		array.push(extra);
		prop_assert_eq!(array.pop_back(), extra);
		prop_assert_eq!(array.len(), values.len());
		prop_assert_eq!(&array, &values);
	}

	#[test]
	fn reallocations_are_logarithmic(n in 1usize..5000) {
		let mut array: DynArray<u32> = DynArray::new();
		let mut reallocations = 0u32;
		for i in 0..n {
			let capacity = array.capacity();
			array.push(i as u32);
			if array.capacity() != capacity {
				reallocations += 1;
			}
			prop_assert!(array.capacity() >= array.len());
		}
		// the capacity starts at 1 and doubles on each reallocation.
		prop_assert!(2usize.pow(reallocations) >= n);
		prop_assert!(reallocations <= usize::BITS - n.leading_zeros());
	}

	#[test]
	fn copies_are_deep(values in proptest::collection::vec(any::<u8>(), 1..100)) {
		let original: DynArray<u8> = DynArray::from_slice(&values);
		let bitwise = original.copy_bitwise();
		let cloned = original.clone();

		for copy in [&bitwise, &cloned].iter() {
			prop_assert_eq!(copy.len(), original.len());
			prop_assert_ne!(copy.as_ptr(), original.as_ptr());
			prop_assert_eq!(*copy, &original);
		}
	}

	#[test]
	fn take_moves_everything(values in proptest::collection::vec(any::<i32>(), 0..100)) {
		let mut a: DynArray<i32> = values.iter().copied().collect();
		let b = a.take();
		prop_assert_eq!(a.len(), 0);
		drop(a);
		prop_assert_eq!(&b, &values);
	}

	#[test]
	fn conversion_applies_from(values in proptest::collection::vec(any::<u8>(), 0..100)) {
		let small: DynArray<u8> = DynArray::from_slice(&values);
		let wide: DynArray<f64> = DynArray::convert_from(&small);
		prop_assert_eq!(wide.len(), small.len());
		for i in 0..small.len() {
			prop_assert_eq!(wide[i], f64::from(small[i]));
		}
	}

	#[test]
	fn adopted_memory_outlives_the_array(values in proptest::collection::vec(any::<u64>(), 1..50)) {
		let mut storage = values.clone();
		{
			let ptr = NonNull::new(storage.as_mut_ptr()).unwrap();
			let array: unchecked::DynArray<u64> = unsafe { DynamicArray::adopt(ptr, storage.len()) };
			prop_assert_eq!(&array, &values);
		}
		// the vector still owns its block and may reallocate it.
		storage.push(0);
		prop_assert_eq!(&storage[..values.len()], &values[..]);
	}

	#[test]
	fn append_concatenates(a in proptest::collection::vec(any::<u8>(), 0..50), b in proptest::collection::vec(any::<u8>(), 0..50)) {
		let mut array: DynArray<u8> = DynArray::from_slice(&a);
		array.append(&DynArray::from_slice(&b));
		let expected: Vec<u8> = a.iter().chain(b.iter()).copied().collect();
		prop_assert_eq!(&array, &expected);
	}
}

#[test]
fn documented_scenario() {
	let mut array: DynArray<i32> = DynArray::new();
	assert_eq!((array.len(), array.capacity()), (0, 1));

	array.push(1);
	array.push(2);
	array.push(3);
	assert_eq!(array.len(), 3);
	assert!(array.capacity() >= 3);
	assert_eq!(array, [1, 2, 3]);

	array.pop_back();
	assert_eq!(array, [1, 2]);

	array.append(&dynarray::dynarray![4, 5]);
	assert_eq!(array.len(), 4);
	assert_eq!(array, [1, 2, 4, 5]);
}
