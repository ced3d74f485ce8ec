use quote::quote;
use syn::*;

struct FieldInfo {
    ident: Ident,
    ty: Type,
    wire: String,
    skip: bool,
}

fn record_name(ast: &DeriveInput) -> Result<String> {
    let mut name = ast.ident.to_string();
    for attr in ast.attrs.iter().filter(|attr| attr.path().is_ident("tson")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let lit: LitStr = meta.value()?.parse()?;
                name = lit.value();
                Ok(())
            } else {
                Err(meta.error("expected `name`"))
            }
        })?;
    }
    Ok(name)
}

fn field_info(field: &Field) -> Result<FieldInfo> {
    let ident = field
        .ident
        .clone()
        .ok_or_else(|| Error::new_spanned(field, "expected a named field"))?;
    let mut wire = ident.to_string();
    let mut skip = false;

    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("tson")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let lit: LitStr = meta.value()?.parse()?;
                wire = lit.value();
                Ok(())
            } else if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("expected `rename` or `skip`"))
            }
        })?;
    }

    Ok(FieldInfo {
        ident,
        ty: field.ty.clone(),
        wire,
        skip,
    })
}

pub fn tson_rep(ast: &DeriveInput, data: &DataStruct) -> Result<proc_macro2::TokenStream> {
    let fields: Vec<FieldInfo> = match &data.fields {
        // C-style structs
        Fields::Named(named) => named.named.iter().map(field_info).collect::<Result<_>>()?,
        // Unit-like structs are records without fields
        Fields::Unit => Vec::new(),
        Fields::Unnamed(_) => {
            return Err(Error::new_spanned(
                &ast.ident,
                "TsonRep can only be derived for structs with named fields",
            ))
        }
    };

    let name = &ast.ident;
    let record_name = record_name(ast)?;

    let mut generics = ast.generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!(::tson::rep::TsonRep));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let (kept, skipped): (Vec<&FieldInfo>, Vec<&FieldInfo>) =
        fields.iter().partition(|field| !field.skip);

    let idents: Vec<&Ident> = kept.iter().map(|field| &field.ident).collect();
    let wires: Vec<&String> = kept.iter().map(|field| &field.wire).collect();
    let types: Vec<&Type> = kept.iter().map(|field| &field.ty).collect();
    let skipped: Vec<&Ident> = skipped.iter().map(|field| &field.ident).collect();

    // to_tson
    let impl_to_tson = quote! {
        fn to_tson(&self) -> ::tson::Tson {
            let mut record = ::tson::Record::new(#record_name);
            #(
                record.fields.push((
                    #wires.to_string(),
                    ::tson::rep::TsonRep::to_tson(&self.#idents),
                ));
            )*
            ::tson::Tson::Record(record)
        }
    };

    // into_tson
    let impl_into_tson = quote! {
        fn into_tson(self) -> ::tson::Tson {
            let mut record = ::tson::Record::new(#record_name);
            #(
                record.fields.push((
                    #wires.to_string(),
                    ::tson::rep::TsonRep::into_tson(self.#idents),
                ));
            )*
            ::tson::Tson::Record(record)
        }
    };

    // from_tson
    let impl_from_tson = quote! {
        fn from_tson(ks: ::tson::Tson) -> ::std::option::Option<Self> {
            let mut record = ks.into_record()?;
            if record.name != #record_name {
                return ::std::option::Option::None;
            }
            ::std::option::Option::Some(#name {
                #( #idents: ::tson::rep::take_field(&mut record, #wires), )*
                #( #skipped: ::std::default::Default::default(), )*
            })
        }
    };

    let impl_zero = quote! {
        fn zero() -> Self {
            #name {
                #( #idents: ::tson::rep::TsonRep::zero(), )*
                #( #skipped: ::std::default::Default::default(), )*
            }
        }
    };

    Ok(quote! {
        impl #impl_generics ::tson::rep::TsonRep for #name #ty_generics #where_clause {
            fn shape() -> ::tson::shape::Shape {
                ::tson::shape::Shape::record(#record_name)
            }

            #impl_to_tson
            #impl_into_tson
            #impl_from_tson
            #impl_zero
        }

        impl #impl_generics ::tson::rep::TsonRecord for #name #ty_generics #where_clause {
            const NAME: &'static str = #record_name;

            fn fields() -> ::std::vec::Vec<::tson::registry::FieldDecl> {
                ::std::vec![
                    #(
                        ::tson::registry::FieldDecl::new(
                            #wires,
                            <#types as ::tson::rep::TsonRep>::shape(),
                        ),
                    )*
                ]
            }
        }
    })
}
