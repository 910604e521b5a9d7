use crate::*;

unsafe impl Reflect for alloc::string::String {
    const DESCRIPTOR: &'static FieldDescriptor = &const {
        FieldDescriptor::builder_for::<Self>()
            .type_identifier("String")
            .vtable(&const { ValueVTable::builder::<Self>().with_value::<Self>().build() })
            .kind(Kind::Text)
            .build()
    };
}

unsafe impl<T> Reflect for alloc::vec::Vec<T>
where
    T: Reflect + Clone + PartialEq + core::fmt::Debug,
{
    const DESCRIPTOR: &'static FieldDescriptor = &const {
        FieldDescriptor::builder_for::<Self>()
            .type_identifier("Vec")
            .vtable(
                &const {
                    ValueVTable::builder::<Self>()
                        .with_default::<Self>()
                        .with_clone::<Self>()
                        .with_eq::<Self>()
                        .with_debug::<Self>()
                        .build()
                },
            )
            .kind(Kind::List(
                &const {
                    ListDef {
                        item: crate::descriptor_of::<T>,
                        len: |list| unsafe { list.get::<Self>() }.len(),
                        get: |list, index| {
                            let list = unsafe { list.get::<Self>() };
                            list.get(index).map(|item| PtrConst::new(item as *const T))
                        },
                        push_clone: |list, item| unsafe {
                            let item = item.get::<T>().clone();
                            list.as_mut::<Self>().push(item);
                        },
                    }
                },
            ))
            .build()
    };
}
