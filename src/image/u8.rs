/// Borrowed 8-bit grayscale raster as handed over by the host application.
#[derive(Clone, Debug)]
pub struct ImageU8<'a> {
    pub w: usize,
    pub h: usize,
    pub stride: usize, // bytes between rows
    pub data: &'a [u8],
}

impl<'a> ImageU8<'a> {
    /// Tightly packed view (`stride == w`).
    pub fn packed(w: usize, h: usize, data: &'a [u8]) -> Self {
        Self {
            w,
            h,
            stride: w,
            data,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.stride + x]
    }

    /// Copy the visible pixels into a packed `image::GrayImage`.
    pub fn to_gray_image(&self) -> image::GrayImage {
        let mut out = image::GrayImage::new(self.w as u32, self.h as u32);
        for y in 0..self.h {
            let src = &self.data[y * self.stride..y * self.stride + self.w];
            for (x, &v) in src.iter().enumerate() {
                out.put_pixel(x as u32, y as u32, image::Luma([v]));
            }
        }
        out
    }
}

impl<'a> crate::image::traits::ImageView for ImageU8<'a> {
    type Pixel = u8;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn stride(&self) -> usize {
        self.stride
    }
    #[inline]
    fn row(&self, y: usize) -> &[u8] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
    #[inline]
    fn as_slice(&self) -> Option<&[u8]> {
        (self.stride == self.w).then_some(&self.data[..self.w * self.h])
    }
}
